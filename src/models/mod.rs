pub mod criteria;
pub mod cuisine;
pub mod restaurant;
pub mod review;
pub mod statistic;
pub mod user;

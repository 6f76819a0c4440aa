pub mod fund_grouping;
pub mod portfolio_service;
pub mod projection;
pub mod valuation;

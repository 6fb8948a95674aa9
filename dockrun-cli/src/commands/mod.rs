pub mod exec;
pub mod ps;
pub mod pull;
pub mod rm;
pub mod run;
pub mod stop;

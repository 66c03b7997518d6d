pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod formality;
pub mod history;
pub mod llm;
pub mod paths;
pub mod prompt;
pub mod proof;

pub mod analyzer;
pub mod config;
pub mod data_models;
pub mod dom;
pub mod fetcher;
pub mod footer;
pub mod navigation;
pub mod page;
pub mod render;
pub mod searcher;
pub mod site;
pub mod snippet;

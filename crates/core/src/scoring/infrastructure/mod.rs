pub mod http_scoring_service;
mod wire;

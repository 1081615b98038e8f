pub mod api_models;

pub mod hf_api;

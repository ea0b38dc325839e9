mod concurrency;
mod errors;
mod properties;
mod scenarios;

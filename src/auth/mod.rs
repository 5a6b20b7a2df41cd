pub mod extractors;
pub mod factory;
pub mod jwt;
pub mod password;
pub mod rotation;
pub mod services;
pub mod store;

#[cfg(test)]
pub mod testing;

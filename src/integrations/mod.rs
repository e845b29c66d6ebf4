pub mod bitgo;

pub use bitgo::BitGoClient;

mod provider;

pub use provider::SubsunacsProvider;

mod provider;

pub use provider::YavkaProvider;

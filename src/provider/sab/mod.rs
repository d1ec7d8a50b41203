mod provider;

pub use provider::SabProvider;

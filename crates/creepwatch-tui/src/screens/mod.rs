pub mod creeps;

pub use creeps::CreepsScreen;

// Application layer - Use case interactors

pub mod concat_interactor;
pub mod container;
pub mod progress_interactor;

// Re-export interactors
pub use concat_interactor::ConcatInteractor;
pub use container::{AppContainer, DefaultAppContainer};
pub use progress_interactor::ProgressInteractor;

pub mod palette;
pub mod plot;

pub use plot::PlotPresenter;

//! Terminal plotting.

pub mod ascii;

pub use ascii::{
    render_accel_plot, render_data_plot, render_fit_plot, render_fit_plot_from_file,
    render_rate_plot,
};

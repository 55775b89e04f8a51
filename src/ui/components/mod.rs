pub mod arc_overlay;
pub mod board_view;
pub mod menu;
pub mod problem_panel;
pub mod progress_bar;
pub mod report_view;
pub mod test_setup;

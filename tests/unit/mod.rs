mod content_boundary_tests;
mod timer_tests;

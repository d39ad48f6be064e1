/// Unit test target
mod basic_tests;
mod properties;

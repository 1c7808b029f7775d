mod support;

mod distance_tests;
mod normalizer_tests;

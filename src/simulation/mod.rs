//! Random network generation for benchmarks and stress tests.

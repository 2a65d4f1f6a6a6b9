// Kernel test modules
#[cfg(test)]
mod bootstrap_tests;

// Recovery manager test module
#[cfg(test)]
mod manager_tests;

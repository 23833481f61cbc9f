#[cfg(test)]
mod scanner_tests;

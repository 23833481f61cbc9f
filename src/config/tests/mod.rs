#[cfg(test)]
mod store_tests;
#[cfg(test)]
mod transaction_tests;

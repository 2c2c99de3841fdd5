pub mod commands;
pub mod session;

#[cfg(test)]
mod test_support;

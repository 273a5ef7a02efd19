/// `dotenv::var` loads `.env` on its first call in a process and sets any
/// variable that is missing. Triggering that load up front keeps it from
/// restoring variables a test has just removed.
pub fn load_dotenv_first() {
    let _ = dotenv::var("PATH");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn removed_variables_stay_removed() {
        std::env::set_var("DB_HOST", "localhost");
        load_dotenv_first();

        std::env::remove_var("DB_HOST");

        assert!(dotenv::var("DB_HOST").is_err());
    }
}

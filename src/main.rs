fn main() {
    chromium_forensics::cli::run();
}

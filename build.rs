fn main() {
    // ESP-IDF link args and cfgs; only present for device builds.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

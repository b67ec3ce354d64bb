fn main() {
    let now = time::OffsetDateTime::now_utc();
    let date_fmt = time::format_description::parse("[month repr:short] [day padding:space] [year]")
        .expect("valid date format");

    let date = std::env::var("FEATURE_UTIL_BUILD_DATE")
        .unwrap_or_else(|_| now.format(&date_fmt).unwrap_or_else(|_| "unknown".to_string()));

    println!("cargo:rerun-if-env-changed=FEATURE_UTIL_BUILD_DATE");
    println!("cargo:rustc-env=FEATURE_UTIL_BUILD_DATE={}", date);
}

pub const PLATE384_DISPLAY_VERSION: &str = env!("PLATE384_DISPLAY_VERSION");
pub const PLATE384_BUILD_N: &str = env!("PLATE384_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "plate384 {}\nBuild {}\n96-well to 384-well qPCR sample setup converter",
        PLATE384_DISPLAY_VERSION, PLATE384_BUILD_N
    )
}

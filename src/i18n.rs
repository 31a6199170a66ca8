// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）、巴西葡萄牙语、中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: &[&str] = &["en", "pt-BR", "zh-CN"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" / "pt-BR" / "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 按环境变量 CONTACT_IMPORT_LOCALE 设置语言（未设置或不支持时保持默认）
pub fn init_from_env() {
    if let Ok(locale) = std::env::var("CONTACT_IMPORT_LOCALE") {
        if SUPPORTED_LOCALES.contains(&locale.as_str()) {
            set_locale(&locale);
        }
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use contact_import::i18n::t;
/// let msg = t("import.row_empty_name");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use contact_import::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/contatos.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        assert_eq!(current_locale(), "pt-BR");

        set_locale("en");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        assert_eq!(t("import.row_empty_name"), "nome vazio, linha ignorada");

        set_locale("zh-CN");
        assert_eq!(t("common.success"), "操作成功");

        set_locale("en");
        assert_eq!(t("import.row_empty_name"), "empty name, row skipped");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args("import.summary", &[("success", "499"), ("errors", "1")]);
        assert_eq!(msg, "Import finished: 499 imported, 1 failed");

        set_locale("pt-BR");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/contatos.csv")]);
        assert!(msg.contains("/tmp/contatos.csv"));
        assert!(msg.contains("Arquivo não encontrado"));

        set_locale("en");
        let msg = t_with_args("import.skipped_row", &[("message", "#3: empty name")]);
        assert_eq!(msg, "  skipped #3: empty name");
    }
}

// ==========================================
// 联系人导入 - 导入规则配置（只读）
// ==========================================
// 职责: 别名表 / 表头关键词 / 兴趣词表 / 性别同义词组 / 默认来源
// 说明: 由引擎入口显式注入，测试可替换为其他词表
// ==========================================

use crate::domain::contact::{CanonicalField, Gender};
use serde::{Deserialize, Serialize};

/// 默认来源字面量
pub const DEFAULT_SOURCE: &str = "Importação";

/// 性别同义词组（组的顺序即匹配优先级）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderGroup {
    pub gender: Gender,
    pub synonyms: Vec<String>,
}

/// 单个标准字段的表头别名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAliases {
    pub field: CanonicalField,
    pub aliases: Vec<String>, // 小写子串
}

// ==========================================
// ImportSchema
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSchema {
    /// 标准字段 → 表头别名（小写子串，多语言）
    pub alias_table: Vec<FieldAliases>,

    /// 判定首行是否为表头的关键词；为空时取别名表全集
    pub header_keywords: Vec<String>,

    /// 标准兴趣词表（保留原始大小写）
    pub interest_vocabulary: Vec<String>,

    /// 性别同义词组，按优先级排列
    pub gender_groups: Vec<GenderGroup>,

    /// source 缺省值
    pub default_source: String,

    /// 交给远程抽取服务处理的扩展名
    pub document_extensions: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ImportSchema {
    fn default() -> Self {
        let alias_table = vec![
            FieldAliases {
                field: CanonicalField::Name,
                aliases: strings(&["nome", "name", "nombre", "cliente", "customer"]),
            },
            FieldAliases {
                field: CanonicalField::Email,
                aliases: strings(&["email", "e-mail", "correo", "mail"]),
            },
            FieldAliases {
                field: CanonicalField::Phone,
                aliases: strings(&[
                    "telefone", "telefono", "teléfono", "phone", "celular", "whatsapp", "fone",
                    "mobile", "tel",
                ]),
            },
            FieldAliases {
                field: CanonicalField::Age,
                aliases: strings(&["idade", "edad", "age"]),
            },
            FieldAliases {
                field: CanonicalField::Gender,
                aliases: strings(&["gênero", "genero", "género", "gender", "sexo", "sex"]),
            },
            FieldAliases {
                field: CanonicalField::State,
                aliases: strings(&["estado", "state", "provincia", "uf"]),
            },
            FieldAliases {
                field: CanonicalField::City,
                aliases: strings(&["cidade", "ciudad", "city", "município", "municipio"]),
            },
            FieldAliases {
                field: CanonicalField::Interests,
                aliases: strings(&["interesse", "interés", "interes", "interest"]),
            },
            FieldAliases {
                field: CanonicalField::Source,
                aliases: strings(&["origem", "origen", "source", "fonte", "canal"]),
            },
            FieldAliases {
                field: CanonicalField::Notes,
                aliases: strings(&[
                    "observa", "obs", "nota", "note", "comentário", "comentario", "comment",
                ]),
            },
        ];

        let gender_groups = vec![
            GenderGroup {
                gender: Gender::Masculine,
                synonyms: strings(&["m", "masc", "masculino", "male", "man", "homem", "h"]),
            },
            GenderGroup {
                gender: Gender::Feminine,
                synonyms: strings(&["f", "fem", "feminino", "female", "woman", "mulher"]),
            },
            GenderGroup {
                gender: Gender::NonBinary,
                synonyms: strings(&[
                    "nb",
                    "não-binário",
                    "nao-binario",
                    "não binário",
                    "nao binario",
                    "não binario",
                    "non-binary",
                    "nonbinary",
                    "non binary",
                ]),
            },
            GenderGroup {
                gender: Gender::Other,
                synonyms: strings(&["outro", "outra", "outros", "other", "otro"]),
            },
            GenderGroup {
                gender: Gender::PreferNotToSay,
                synonyms: strings(&[
                    "prefiro não dizer",
                    "prefiro nao dizer",
                    "prefiro não informar",
                    "prefiro nao informar",
                    "não informado",
                    "nao informado",
                    "prefer not to say",
                    "n/a",
                ]),
            },
        ];

        Self {
            alias_table,
            header_keywords: Vec::new(),
            interest_vocabulary: strings(&[
                "Música",
                "Esportes",
                "Tecnologia",
                "Educação",
                "Saúde",
                "Cultura",
                "Meio Ambiente",
                "Política",
                "Religião",
                "Empreendedorismo",
            ]),
            gender_groups,
            default_source: DEFAULT_SOURCE.to_string(),
            document_extensions: strings(&["pdf", "docx", "doc", "png", "jpg", "jpeg", "txt"]),
        }
    }
}

impl ImportSchema {
    /// 从 JSON 读取（未给出的字段取默认值）
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 某个标准字段的别名（未配置时为空）
    pub fn aliases_for(&self, field: CanonicalField) -> &[String] {
        self.alias_table
            .iter()
            .find(|a| a.field == field)
            .map(|a| a.aliases.as_slice())
            .unwrap_or(&[])
    }

    /// 表头判定关键词：显式配置优先，否则为别名表全集
    pub fn effective_header_keywords(&self) -> Vec<String> {
        if !self.header_keywords.is_empty() {
            return self
                .header_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect();
        }
        self.alias_table
            .iter()
            .flat_map(|a| a.aliases.iter().map(|k| k.to_lowercase()))
            .collect()
    }

    pub fn is_document_extension(&self, ext: &str) -> bool {
        self.document_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

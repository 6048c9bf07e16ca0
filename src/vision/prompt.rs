//! Narration prompt templates.
//!
//! The whole instruction set travels as one text part next to the image.
//! Spanish gets its own template; every other language uses the English one
//! with an explicit directive naming the output language.

use crate::record::PlantRecord;

/// Upper bound on narration length that the prompt asks for.
pub const MAX_NARRATION_WORDS: u32 = 150;

pub fn build(record: &PlantRecord, language: &str) -> String {
    if language.eq_ignore_ascii_case("es") {
        spanish(record)
    } else {
        english(record, language_name(language))
    }
}

fn spanish(record: &PlantRecord) -> String {
    let mut prompt = format!(
        "Genera una narración natural en español para una persona invidente que describa \
         la siguiente planta de un huerto urbano:\n\n\
         Nombre de la planta: {}\n\
         Ubicación: {}\n\
         Descripción: {}\n\
         Tareas pendientes: {}\n",
        record.title, record.location, record.description, record.tasks
    );

    if !record.comments.is_empty() {
        prompt.push_str(&format!("\nComentarios adicionales: {}\n", record.comments));
    }

    prompt.push_str(&format!(
        "\nDetalles importantes:\n\
         - La narración debe ser descriptiva pero concisa (máximo {} palabras)\n\
         - Describe visualmente la planta según la imagen proporcionada\n\
         - Usa un tono amigable y cercano\n\
         - Menciona específicamente las tareas que hay que realizar\n\
         - Organiza la información de forma clara y estructurada\n\
         - Responde solo con la narración, sin nada más\n",
        MAX_NARRATION_WORDS
    ));
    prompt
}

fn english(record: &PlantRecord, language: &str) -> String {
    let mut prompt = format!(
        "Write a natural narration for a blind or visually impaired listener describing \
         the following plant from an urban garden. Write the narration in {}.\n\n\
         Plant name: {}\n\
         Location: {}\n\
         Description: {}\n\
         Pending tasks: {}\n",
        language, record.title, record.location, record.description, record.tasks
    );

    if !record.comments.is_empty() {
        prompt.push_str(&format!("\nAdditional comments: {}\n", record.comments));
    }

    prompt.push_str(&format!(
        "\nImportant details:\n\
         - The narration must be descriptive but concise (at most {} words)\n\
         - Describe how the plant looks based on the attached image\n\
         - Use a warm, friendly tone\n\
         - Mention the pending tasks explicitly\n\
         - Organize the information clearly\n\
         - Answer only with the narration, nothing else\n",
        MAX_NARRATION_WORDS
    ));
    prompt
}

/// English name of a language code, falling back to the code itself.
pub fn language_name(code: &str) -> &str {
    match code.to_ascii_lowercase().as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "pl" => "Polish",
        "tr" => "Turkish",
        "ru" => "Russian",
        "nl" => "Dutch",
        "cs" => "Czech",
        "ar" => "Arabic",
        "zh-cn" => "Chinese",
        "hu" => "Hungarian",
        "ko" => "Korean",
        "ja" => "Japanese",
        "hi" => "Hindi",
        "ca" => "Catalan",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PlantRecord {
        PlantRecord::new(
            "Tomate Cherry",
            "Parcela 3, Fila 2",
            vec![0u8],
            "Planta de tomate con frutos pequeños",
            "Riego diario",
        )
    }

    #[test]
    fn test_spanish_prompt_embeds_every_field() {
        let prompt = build(&record(), "es");
        for needle in [
            "Tomate Cherry",
            "Parcela 3, Fila 2",
            "Planta de tomate con frutos pequeños",
            "Tareas pendientes: Riego diario",
            "máximo 150 palabras",
            "invidente",
        ] {
            assert!(prompt.contains(needle), "missing {needle:?}");
        }
        assert!(!prompt.contains("Comentarios adicionales"));
    }

    #[test]
    fn test_comments_get_their_own_section() {
        let prompt = build(&record().with_comments("Hojas amarillas"), "es");
        assert!(prompt.contains("\nComentarios adicionales: Hojas amarillas\n"));
    }

    #[test]
    fn test_other_languages_name_the_output_language() {
        let prompt = build(&record().with_comments("Yellow leaves"), "fr");
        assert!(prompt.contains("Write the narration in French."));
        assert!(prompt.contains("Pending tasks: Riego diario"));
        assert!(prompt.contains("Additional comments: Yellow leaves"));
    }

    #[test]
    fn test_unknown_code_is_passed_through() {
        assert_eq!(language_name("eo"), "eo");
        assert_eq!(language_name("ZH-CN"), "Chinese");
    }
}

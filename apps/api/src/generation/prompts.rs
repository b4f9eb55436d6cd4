// Prompt templates for the Generation module.
// Both templates take the job posting and the candidate's CV verbatim.
// The wording is Bulgarian; the product serves Bulgarian-speaking job seekers.

pub const JOB_PLACEHOLDER: &str = "{job_text}";
pub const CV_PLACEHOLDER: &str = "{cv_text}";

/// CV adaptation prompt. Replace `{job_text}` and `{cv_text}` via [`fill`].
pub const ADAPT_CV_PROMPT_TEMPLATE: &str = r#"
Ти си интелигентен асистент, който помага на хора да адаптират своето CV спрямо конкретна обява за работа.

На база следната обява:
{job_text}

И автобиографията на кандидата:
{cv_text}

Адаптирай CV-то така, че да подчертае най-подходящите умения и опит за позицията, като запазиш естествен и професионален стил.
"#;

/// Cover letter prompt. Replace `{job_text}` and `{cv_text}` via [`fill`].
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"
Ти си интелигентен асистент, който помага на хора да напишат мотивационно писмо за работа.

На база следната обява:
{job_text}

И автобиографията на кандидата:
{cv_text}

Генерирай пълно мотивационно писмо, без повторения, с естествено звучащо начало и край. Използвай ясен, приятелски тон и не използвай клишета.
"#;

/// Substitutes both placeholders in one pass over the template, so user
/// text that happens to contain `{cv_text}` or `{job_text}` is left alone.
pub fn fill(template: &str, job_text: &str, cv_text: &str) -> String {
    template
        .split(JOB_PLACEHOLDER)
        .map(|part| part.replace(CV_PLACEHOLDER, cv_text))
        .collect::<Vec<_>>()
        .join(job_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_embeds_both_inputs() {
        let prompt = fill(COVER_LETTER_PROMPT_TEMPLATE, "Rust developer, Sofia", "5 years of Go");
        assert!(prompt.contains("На база следната обява:\nRust developer, Sofia\n"));
        assert!(prompt.contains("И автобиографията на кандидата:\n5 years of Go\n"));
        assert!(!prompt.contains(JOB_PLACEHOLDER));
        assert!(!prompt.contains(CV_PLACEHOLDER));
    }

    #[test]
    fn test_fill_does_not_expand_placeholders_inside_inputs() {
        let prompt = fill(ADAPT_CV_PROMPT_TEMPLATE, "wants {cv_text}", "has {job_text}");
        assert!(prompt.contains("wants {cv_text}"));
        assert!(prompt.contains("has {job_text}"));
    }

    #[test]
    fn test_templates_contain_each_placeholder_once() {
        for template in [ADAPT_CV_PROMPT_TEMPLATE, COVER_LETTER_PROMPT_TEMPLATE] {
            assert_eq!(template.matches(JOB_PLACEHOLDER).count(), 1);
            assert_eq!(template.matches(CV_PLACEHOLDER).count(), 1);
        }
    }

    #[test]
    fn test_templates_differ_in_instruction() {
        assert!(ADAPT_CV_PROMPT_TEMPLATE.contains("Адаптирай CV-то"));
        assert!(COVER_LETTER_PROMPT_TEMPLATE.contains("мотивационно писмо"));
    }
}

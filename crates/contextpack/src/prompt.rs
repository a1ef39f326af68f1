use crate::injection::format_knowledge_section;

/// Renders the system prompt that opens every new session.
///
/// The instruction block is fixed and written in Czech, the language the
/// assistant answers in.  It keeps answers to two or three sentences,
/// restricts them to the knowledge section and sends unanswerable questions
/// to the business directly.
#[derive(Debug, Clone)]
pub struct SystemPromptBuilder {
    business_name: String,
}

impl SystemPromptBuilder {
    pub fn new(business_name: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
        }
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    /// Render the prompt for the given knowledge text.
    ///
    /// Pure: the same knowledge always yields the same prompt.
    pub fn render(&self, knowledge: &str) -> String {
        let name = &self.business_name;
        let mut prompt = format!(
            "\
Jsi pratelsky a profesionalni zakaznicky asistent spolecnosti {name}.
Odpovidas na otazky zakazniku o firme {name}, jejich sluzbech, pobockach a kontaktech.

DULEZITE PRAVIDLO: Odpovidej VELMI STRUCNE - maximalne 2-3 kratke vety.
Pokud se zakaznik pta na detail, odpovez kratce a nabidni ze muzes upresnit.
Odpovidej cesky, presne na zaklade znalostni baze.
Pokud odpoved neznas, doporuc kontaktovat {name} primo.

"
        );
        prompt.push_str(&format_knowledge_section(knowledge));
        prompt
    }
}

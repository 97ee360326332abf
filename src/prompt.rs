//! Prompt assembly from labelled text sections

use serde::{Deserialize, Serialize};

pub const DEFAULT_VARIABLES_LABEL: &str = "questions";

/// A labelled block of static instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section
{   pub label: String
  , pub content: String
}

/// Ordered sections plus the variable inputs appended after them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate
{   pub sections: Vec<Section>
  , pub variables_label: String
  , pub variables: Vec<String>
}

impl Default for PromptTemplate
{   fn default() -> Self
    {   PromptTemplate
        {   sections: vec![]
          , variables_label: DEFAULT_VARIABLES_LABEL.to_string()
          , variables: vec![]
        }
    }
}

impl PromptTemplate
{   pub fn new() -> Self
    {   PromptTemplate::default()
    }

    pub fn section(
      mut self
    , label: impl Into<String>
    , content: impl Into<String>
    ) -> Self
    {   self.sections.push(Section
        {   label: label.into()
          , content: content.into()
        });
        self
    }

    pub fn variables_label(mut self, label: impl Into<String>) -> Self
    {   self.variables_label = label.into();
        self
    }

    pub fn variables<I, S>(mut self, vars: I) -> Self
    where I: IntoIterator<Item = S>
        , S: Into<String>
    {   self.variables.extend(vars.into_iter().map(Into::into));
        self
    }

    pub fn build(&self) -> String
    {   build_prompt(&self.sections, &self.variables_label, &self.variables)
    }
}

/// Lay out `label:\ncontent\n\n` for every section, then the
/// variables the same way, one per line. An empty variable list
/// emits no variables block.
pub fn build_prompt(
  sections: &[Section]
, variables_label: &str
, variables: &[String]
) -> String
{   let mut out = String::new();
    for section in sections
    {   push_block(&mut out, &section.label, &section.content);
    }
    if !variables.is_empty()
    {   push_block(&mut out, variables_label, &variables.join("\n"));
    }
    out
}

fn push_block(out: &mut String, label: &str, content: &str)
{   out.push_str(label);
    out.push_str(":\n");
    out.push_str(content);
    out.push_str("\n\n");
}

/// Single-prompt variant: ask for the title of `text`
pub fn title_extraction_prompt(text: &str) -> String
{   format!("Extract the title of the following text:\n\n{}", text)
}

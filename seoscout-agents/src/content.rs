//! Content-generation agent
//!
//! Drafts long-form content from a keyword and a structure template, refines
//! it against a target length, and critiques it. The token budget scales at
//! 2.5 tokens per requested word up to a fixed ceiling; refinement recomputes
//! the budget from the latest requested length, so repeated refinement
//! converges on what the user asked for last instead of anchoring to the
//! current draft.

use std::str::FromStr;

use tracing::info;

use seoscout_core::Draft;

use crate::{AgentError, ContentResearch, SharedBackend};

/// Generation tokens granted per requested word
pub const TOKENS_PER_WORD: f64 = 2.5;

/// Hard ceiling on a single generation call
pub const GENERATION_TOKEN_CEILING: u16 = 8192;

/// Token budget for a target word count: `round(words * 2.5)`, clipped
pub fn generation_budget(target_words: usize) -> u16 {
    let raw = (target_words as f64 * TOKENS_PER_WORD).round();
    if raw >= GENERATION_TOKEN_CEILING as f64 {
        GENERATION_TOKEN_CEILING
    } else {
        raw as u16
    }
}

/// Supported content structures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    BlogPost,
    LandingPage,
    ProductPage,
    Guide,
    Comparison,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::BlogPost => "Blog Post",
            ContentType::LandingPage => "Landing Page",
            ContentType::ProductPage => "Product Page",
            ContentType::Guide => "Guide/Tutorial",
            ContentType::Comparison => "Comparison Article",
        }
    }

    /// Markdown skeleton the draft should follow
    pub fn template(&self) -> &'static str {
        match self {
            ContentType::BlogPost => {
                r#"# {title}

## Introduction

## {section_1_title}

## {section_2_title}

## {section_3_title}

## Key Takeaways

## Conclusion
"#
            }
            ContentType::LandingPage => {
                r#"# {headline}

## {value_proposition}

### Benefits

### Features

### How It Works

### Call to Action
"#
            }
            ContentType::ProductPage => {
                r#"# {product_name}

## Product Overview

## Key Features

## Specifications

## Benefits

## Pricing

## Call to Action
"#
            }
            ContentType::Guide => {
                r#"# {title}

## What You'll Learn

## Prerequisites

## Step 1: {step_1_title}

## Step 2: {step_2_title}

## Step 3: {step_3_title}

## Common Issues & Solutions

## Summary

## Next Steps
"#
            }
            ContentType::Comparison => {
                r#"# {title}

## Quick Comparison Table

## Overview

## {option_1_name} Review

## {option_2_name} Review

## Final Verdict

## Recommendation
"#
            }
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '_'], "-").as_str() {
            "blog-post" | "blog" => Ok(ContentType::BlogPost),
            "landing-page" | "landing" => Ok(ContentType::LandingPage),
            "product-page" | "product" => Ok(ContentType::ProductPage),
            "guide" | "guide-tutorial" | "tutorial" => Ok(ContentType::Guide),
            "comparison" | "comparison-article" => Ok(ContentType::Comparison),
            other => Err(format!("unknown content type '{}'", other)),
        }
    }
}

/// Everything a generation call needs
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub keyword: String,
    pub title: String,
    pub content_type: ContentType,
    pub audience: String,
    pub target_words: usize,
}

/// Content-generation agent over an LLM backend
pub struct ContentAgent {
    backend: SharedBackend,
}

impl ContentAgent {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Generate a full draft, optionally weaving in fresh research
    pub async fn generate(
        &self,
        params: &GenerateParams,
        research: Option<&ContentResearch>,
    ) -> Result<Draft, AgentError> {
        let budget = generation_budget(params.target_words);
        info!(
            "generating {} '{}' ({} words, {} token budget)",
            params.content_type.label(),
            params.title,
            params.target_words,
            budget
        );

        let prompt = generation_prompt(params, research);
        let raw = self
            .backend
            .generate(&prompt, budget, 0.7)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        let content = post_process(&raw, &params.title);
        Ok(Draft::new(
            &params.title,
            params.content_type.label(),
            &params.audience,
            content,
        ))
    }

    /// Revise a draft per an instruction, re-budgeting from the new target
    /// word count rather than the current draft's length
    pub async fn refine(
        &self,
        current: &str,
        instruction: &str,
        keyword: &str,
        target_words: usize,
    ) -> Result<String, AgentError> {
        let budget = generation_budget(target_words);
        info!("refining draft toward {} words ({} token budget)", target_words, budget);

        let keyword_line = if keyword.is_empty() {
            String::new()
        } else {
            format!("PRIMARY KEYWORD TO MAINTAIN: {}\n", keyword)
        };

        let prompt = format!(
            r#"You are refining existing content based on user feedback.

CURRENT CONTENT:
{current}

REFINEMENT INSTRUCTION:
{instruction}

TARGET LENGTH: {target_words} words

{keyword_line}
Please revise the content according to the instruction while:
1. Maintaining the overall structure and key points
2. Keeping SEO optimization intact
3. Preserving the target audience focus
4. Ensuring the refined version is coherent and complete

Provide the refined content:"#
        );

        let refined = self
            .backend
            .generate(&prompt, budget, 0.5)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        Ok(post_process(&refined, ""))
    }

    /// Five-area critique of a draft
    pub async fn suggest_improvements(&self, content: &str) -> Result<Vec<String>, AgentError> {
        let snippet: String = content.chars().take(2000).collect();
        let ellipsis = if content.len() > 2000 { "..." } else { "" };

        let prompt = format!(
            r#"Analyze this content and provide 5 specific, actionable improvement suggestions:

{snippet}{ellipsis}

Provide ONE concise suggestion for each area (keep each under 100 words):
1. SEO optimization - keyword usage and search visibility
2. Readability and engagement - tone, formatting, user experience
3. Content structure - organization, headings, flow
4. Call-to-action effectiveness - conversion elements
5. Target audience appeal - relevance and resonance

Format each suggestion as:
[Area]: [Specific actionable suggestion]

Be specific and practical. Avoid generic advice."#
        );

        let response = self
            .backend
            .generate(&prompt, crate::SUGGESTION_TOKENS, 0.3)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        let suggestions: Vec<String> = response
            .lines()
            .map(str::trim)
            .filter(|line| {
                line.starts_with(['-', '*'])
                    || line.starts_with("1")
                    || line.starts_with("2")
                    || line.starts_with("3")
                    || line.starts_with("4")
                    || line.starts_with("5")
            })
            .map(|line| {
                line.trim_start_matches(['-', '*', '1', '2', '3', '4', '5', '.', ')', ' '])
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .collect();

        if suggestions.is_empty() {
            Ok(vec![
                "Consider adding more specific examples".to_string(),
                "Include relevant statistics".to_string(),
                "Strengthen the call-to-action".to_string(),
            ])
        } else {
            Ok(suggestions)
        }
    }
}

fn generation_prompt(params: &GenerateParams, research: Option<&ContentResearch>) -> String {
    let mut research_context = String::new();
    if let Some(research) = research.filter(|r| !r.is_empty()) {
        if !research.competitor_titles.is_empty() {
            research_context.push_str("\nCompetitor Content Insights:\n");
            for title in &research.competitor_titles {
                research_context.push_str(&format!("- {}\n", title));
            }
        }
        if !research.related_terms.is_empty() {
            research_context.push_str(&format!(
                "\nRelated Keywords to Include: {}\n",
                research.related_terms.join(", ")
            ));
        }
        if let Some(trending) = &research.trending {
            research_context.push_str(&format!(
                "\nTrend Status: This topic is currently {}\n",
                trending
            ));
        }
    }

    format!(
        r#"You are an expert content writer specializing in SEO-optimized, engaging content.

ROLE: Create a {content_type} that is informative, engaging, and optimized for search engines.

TARGET AUDIENCE: {audience}

TITLE: {title}

TARGET WORD COUNT: {words} words

CONTENT TYPE STRUCTURE: {content_type}
{template}

PRIMARY KEYWORD: {keyword}
{research_context}
WRITING GUIDELINES:
1. Write in a conversational yet professional tone appropriate for {audience}
2. Use the primary keyword naturally 3-5 times throughout the content
3. Include related keywords and semantic variations naturally
4. Create compelling headers and subheaders
5. Use short paragraphs (2-3 sentences) for better readability
6. Include actionable insights and practical examples
7. End with a strong call-to-action appropriate for the content type
8. Maintain approximately {words} words

IMPORTANT:
- Do NOT use generic filler content
- Do NOT keyword stuff
- Focus on providing genuine value to the reader
- Make the content scannable with proper formatting
- Use markdown formatting for headers, lists, and emphasis

Now, generate the complete {content_type} content:"#,
        content_type = params.content_type.label(),
        audience = params.audience,
        title = params.title,
        words = params.target_words,
        template = params.content_type.template(),
        keyword = params.keyword,
        research_context = research_context,
    )
}

/// Normalize a generated draft: leading title, no placeholder markers,
/// breathing room around headings
pub fn post_process(content: &str, title: &str) -> String {
    let mut content = content.trim().to_string();

    if !content.starts_with('#') && !title.is_empty() {
        content = format!("# {}\n\n{}", title, content);
    }

    content = content
        .replace("[stat needed]", "(industry research shows)")
        .replace("[source]", "");

    let mut processed: Vec<String> = Vec::new();
    for line in content.lines() {
        let trimmed = cleanup_shouted_heading(line);
        if trimmed.starts_with('#') {
            if processed.last().is_some_and(|prev| !prev.trim().is_empty()) {
                processed.push(String::new());
            }
            processed.push(trimmed);
            processed.push(String::new());
        } else {
            processed.push(trimmed);
        }
    }

    processed.join("\n").trim().to_string()
}

/// An all-caps line is almost always a heading the model forgot to mark
fn cleanup_shouted_heading(line: &str) -> String {
    let trimmed = line.trim_end();
    let has_alpha = trimmed.chars().any(|c| c.is_alphabetic());
    let all_upper = trimmed
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_uppercase());

    if !trimmed.is_empty() && !trimmed.starts_with('#') && has_alpha && all_upper {
        format!("## {}", title_case(trimmed))
    } else {
        trimmed.to_string()
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LlmBackend, LlmError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoBackend;

    #[async_trait]
    impl LlmBackend for EchoBackend {
        async fn generate(
            &self,
            _prompt: &str,
            max_tokens: u16,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Ok(format!("draft body within {} tokens", max_tokens))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_generation_budget_scales() {
        assert_eq!(generation_budget(500), 1250);
        assert_eq!(generation_budget(1000), 2500);
        assert_eq!(generation_budget(0), 0);
    }

    #[test]
    fn test_generation_budget_ceiling() {
        assert_eq!(generation_budget(4000), GENERATION_TOKEN_CEILING);
        assert_eq!(generation_budget(100_000), GENERATION_TOKEN_CEILING);
        // The last uncapped value sits just below the ceiling
        assert_eq!(generation_budget(3276), 8190);
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("blog-post".parse::<ContentType>().unwrap(), ContentType::BlogPost);
        assert_eq!("Blog Post".parse::<ContentType>().unwrap(), ContentType::BlogPost);
        assert_eq!("guide".parse::<ContentType>().unwrap(), ContentType::Guide);
        assert!("haiku".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_post_process_prepends_title() {
        let processed = post_process("just a body", "My Title");
        assert!(processed.starts_with("# My Title"));
        assert!(processed.contains("just a body"));
    }

    #[test]
    fn test_post_process_strips_placeholders() {
        let processed = post_process("Numbers [stat needed] and [source] cited.", "T");
        assert!(!processed.contains("[stat needed]"));
        assert!(!processed.contains("[source]"));
        assert!(processed.contains("(industry research shows)"));
    }

    #[test]
    fn test_post_process_promotes_shouted_headings() {
        let processed = post_process("# T\n\nintro\nKEY TAKEAWAYS\nmore text", "T");
        assert!(processed.contains("## Key Takeaways"));
    }

    #[test]
    fn test_post_process_spaces_headings() {
        let processed = post_process("# T\nbody\n## Next\nmore", "T");
        let lines: Vec<&str> = processed.lines().collect();
        let heading_idx = lines.iter().position(|l| *l == "## Next").unwrap();
        assert_eq!(lines[heading_idx - 1], "");
        assert_eq!(lines[heading_idx + 1], "");
    }

    #[tokio::test]
    async fn test_generate_produces_draft() {
        let agent = ContentAgent::new(Arc::new(EchoBackend) as SharedBackend);
        let params = GenerateParams {
            keyword: "seo".to_string(),
            title: "SEO Basics".to_string(),
            content_type: ContentType::BlogPost,
            audience: "beginners".to_string(),
            target_words: 500,
        };
        let draft = agent.generate(&params, None).await.unwrap();
        assert_eq!(draft.title, "SEO Basics");
        assert!(draft.content.starts_with("# SEO Basics"));
        // Budget surfaced by the echo backend proves the 2.5x formula was used
        assert!(draft.content.contains("1250"));
    }

    #[tokio::test]
    async fn test_refine_budgets_from_new_target() {
        let agent = ContentAgent::new(Arc::new(EchoBackend) as SharedBackend);
        let long_draft = "word ".repeat(4000);
        let refined = agent.refine(&long_draft, "tighten it", "seo", 500).await.unwrap();
        // 500-word target yields a 1250-token budget regardless of draft size
        assert!(refined.contains("1250"));
    }
}

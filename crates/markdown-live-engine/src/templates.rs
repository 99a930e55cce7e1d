//! Built-in starting points for new documents.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Writing,
    Career,
    Productivity,
    Developer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub content: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "blog-post",
        title: "Blog Post",
        category: Category::Writing,
        content: "# Post Title\n\n\
_Published on YYYY-MM-DD_\n\n\
## Introduction\n\n\
Hook the reader and say what the post is about.\n\n\
## Main Points\n\n\
- First point\n\
- Second point\n\
- Third point\n\n\
## Conclusion\n\n\
Wrap up and tell the reader what to do next.\n",
    },
    Template {
        id: "resume",
        title: "Resume",
        category: Category::Career,
        content: "# Your Name\n\n\
email@example.com | City, Country | [portfolio](https://example.com)\n\n\
## Summary\n\n\
Two or three sentences about who you are and what you do.\n\n\
## Experience\n\n\
### Job Title, Company\n\
_Start - End_\n\n\
- Achievement with a measurable result\n\
- Another achievement\n\n\
## Education\n\n\
### Degree, Institution\n\
_Year_\n\n\
## Skills\n\n\
| Area | Skills |\n\
| ---- | ------ |\n\
| Languages | ... |\n\
| Tools | ... |\n",
    },
    Template {
        id: "todo-list",
        title: "Todo List",
        category: Category::Productivity,
        content: "# Todo\n\n\
## Today\n\n\
- [ ] First task\n\
- [ ] Second task\n\n\
## This Week\n\n\
- [ ] Bigger task\n\n\
## Done\n\n\
- [x] Set up this list\n",
    },
    Template {
        id: "github-profile",
        title: "GitHub Profile",
        category: Category::Developer,
        content: "# Hi, I'm Your Name\n\n\
> One line about what you build.\n\n\
## About Me\n\n\
- Currently working on ...\n\
- Learning ...\n\
- Ask me about ...\n\n\
## Tech Stack\n\n\
`rust` `typescript` `postgres`\n\n\
## Contact\n\n\
- [Website](https://example.com)\n",
    },
];

pub fn all() -> &'static [Template] {
    TEMPLATES
}

pub fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.id == id)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static Template> {
    TEMPLATES
        .iter()
        .filter(move |template| template.category == category)
}

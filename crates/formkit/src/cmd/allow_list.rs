use anyhow::Result;
use clap::{Args, ValueEnum};
use form_spec::options::categories_of;
use form_spec::{ALL_OPTIONS, OptionCategory};
use serde_json::{Map, Value};

#[derive(Args, Debug, Clone, Default)]
pub struct AllowListArgs {
    /// Only list one category
    #[arg(long, value_enum)]
    pub category: Option<Category>,
    /// Show the categories a single key belongs to
    #[arg(long, value_name = "KEY", conflicts_with = "category")]
    pub key: Option<String>,
    /// Print a JSON object keyed by category
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Label,
    Container,
    Wrapper,
    Input,
    Other,
}

impl From<Category> for OptionCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Label => OptionCategory::Label,
            Category::Container => OptionCategory::Container,
            Category::Wrapper => OptionCategory::Wrapper,
            Category::Input => OptionCategory::Input,
            Category::Other => OptionCategory::Other,
        }
    }
}

pub fn run(args: &AllowListArgs) -> Result<()> {
    if let Some(key) = &args.key {
        return explain_key(key, args.json);
    }

    let categories: Vec<OptionCategory> = match args.category {
        Some(category) => vec![category.into()],
        None => OptionCategory::ALL.to_vec(),
    };

    if args.json {
        let mut map = Map::new();
        for category in &categories {
            map.insert(category.as_str().to_string(), Value::from(category.keys().to_vec()));
        }
        if args.category.is_none() {
            map.insert("all".into(), Value::from(ALL_OPTIONS.clone()));
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(map))?);
        return Ok(());
    }

    for category in categories {
        println!("{}: {}", category.as_str(), category.keys().join(", "));
    }
    Ok(())
}

fn explain_key(key: &str, json: bool) -> Result<()> {
    let names: Vec<&str> = categories_of(key).into_iter().map(OptionCategory::as_str).collect();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "key": key, "categories": names }))?
        );
    } else if names.is_empty() {
        println!("{key}: not a recognized option");
    } else {
        println!("{key}: {}", names.join(", "));
    }
    Ok(())
}

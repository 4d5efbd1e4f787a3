// Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "recommender")]
#[command(about = "Recipe recommender - lexical and semantic recipe matching", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Recommend recipes for a list of ingredients
    Recommend {
        /// Ingredients, space or comma separated
        #[arg(required = true, value_delimiter = ',')]
        ingredients: Vec<String>,

        /// Number of recipes to return
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },

    /// Recommend recipes for a free-text description of what you have
    Ask {
        /// Free text, e.g. "I have eggs and rice"
        text: String,

        /// Number of recipes to return
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },

    /// Recommend recipes semantically similar to a query
    Semantic {
        /// Natural-language query
        query: String,

        /// Number of recipes to return
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },

    /// List the known ingredients found in a piece of text
    Extract {
        /// Free text
        text: String,
    },

    /// Compute the corpus embeddings and write the embedding cache
    BuildEmbeddings,
}

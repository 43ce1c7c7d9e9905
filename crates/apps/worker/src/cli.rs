use clap::{Args, Parser, Subcommand};
use common_types::WorkingSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Face index maintenance and search tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index the faces of one photo.
    Index {
        photo_id: String,
        /// Re-index even if the photo is already indexed.
        #[arg(long, short, default_value_t = false)]
        force: bool,
        /// Use this image instead of the photo's file in the media folder.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Index every unindexed photo of a working set. Ctrl-C stops after the current photo.
    Bulk(BulkArgs),
    /// Find photos containing the face in an image, or close to a stored descriptor.
    Search(SearchArgs),
    /// Apply the database migrations and exit.
    Migrate,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct BulkArgs {
    #[arg(long)]
    pub photographer: Option<String>,
    #[arg(long)]
    pub event: Option<String>,
    #[arg(long, num_args = 1..)]
    pub photos: Option<Vec<String>>,
}

impl BulkArgs {
    #[must_use]
    pub fn working_set(self) -> Option<WorkingSet> {
        if let Some(photographer_id) = self.photographer {
            return Some(WorkingSet::Photographer { photographer_id });
        }
        if let Some(event_id) = self.event {
            return Some(WorkingSet::Event { event_id });
        }
        self.photos.map(|photo_ids| WorkingSet::Photos { photo_ids })
    }
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Selfie image to search with.
    #[arg(long, conflicts_with = "descriptor", required_unless_present = "descriptor")]
    pub image: Option<PathBuf>,
    /// JSON file holding a descriptor as an array of numbers.
    #[arg(long)]
    pub descriptor: Option<PathBuf>,
    #[arg(long)]
    pub threshold: Option<f64>,
    #[arg(long)]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("worker").chain(args.iter().copied()))
    }

    #[test]
    fn parses_bulk_working_sets() -> Result<(), clap::Error> {
        let Command::Bulk(args) = parse(&["bulk", "--photos", "a", "b"])?.command else {
            panic!("expected bulk command");
        };
        assert_eq!(
            args.working_set(),
            Some(WorkingSet::Photos {
                photo_ids: vec!["a".to_owned(), "b".to_owned()]
            })
        );

        let Command::Bulk(args) = parse(&["bulk", "--event", "ev_1"])?.command else {
            panic!("expected bulk command");
        };
        assert_eq!(
            args.working_set(),
            Some(WorkingSet::Event {
                event_id: "ev_1".to_owned()
            })
        );
        Ok(())
    }

    #[test]
    fn bulk_needs_exactly_one_scope() {
        assert!(parse(&["bulk"]).is_err());
        assert!(parse(&["bulk", "--event", "e", "--photographer", "p"]).is_err());
    }

    #[test]
    fn search_needs_one_query() {
        assert!(parse(&["search"]).is_err());
        assert!(parse(&["search", "--image", "a.jpg", "--descriptor", "d.json"]).is_err());
        assert!(parse(&["search", "--image", "a.jpg", "--threshold", "0.4"]).is_ok());
    }
}

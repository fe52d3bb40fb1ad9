//! Persisted induced-graph tasks.
//!
//! One file per `(class, split)`:
//!
//! ```text
//! {root}/{dataset}/induced_graphs/task{c}.meta.train.support
//! {root}/{dataset}/induced_graphs/task{c}.meta.train.query
//! {root}/{dataset}/induced_graphs/task{c}.meta.test.support
//! {root}/{dataset}/induced_graphs/task{c}.meta.test.query
//! ```
//!
//! Each file is a bincode-encoded record with a single field `pos` holding
//! the ordered list of graphs.

use crate::algo::sampling::ClassTasks;
use crate::batch::GraphBatch;
use crate::graph::{Graph, Label};
use crate::rng::RngState;
use crate::Result;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The four task splits generated per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSplit {
    TrainSupport = 0,
    TrainQuery = 1,
    TestSupport = 2,
    TestQuery = 3,
}

/// All splits, in file/generation order.
pub const SPLITS: [TaskSplit; 4] = [
    TaskSplit::TrainSupport,
    TaskSplit::TrainQuery,
    TaskSplit::TestSupport,
    TaskSplit::TestQuery,
];

impl TaskSplit {
    fn suffix(self) -> &'static str {
        match self {
            TaskSplit::TrainSupport => "train.support",
            TaskSplit::TrainQuery => "train.query",
            TaskSplit::TestSupport => "test.support",
            TaskSplit::TestQuery => "test.query",
        }
    }

    /// `task{class}.meta.{train|test}.{support|query}`
    pub fn file_name(self, class: usize) -> String {
        format!("task{class}.meta.{}", self.suffix())
    }
}

#[derive(Serialize)]
struct TaskFileRef<'a> {
    pos: &'a [Graph],
}

#[derive(Deserialize)]
struct TaskFile {
    pos: Vec<Graph>,
}

/// Write `graphs` as a task file.
pub fn write_graphs(path: impl AsRef<Path>, graphs: &[Graph]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &TaskFileRef { pos: graphs })?;
    Ok(())
}

/// Read the graphs of a task file.
///
/// Every decoded graph is validated, so an edge pointing past the feature
/// rows fails here with [`crate::Error::InvalidEdge`].
pub fn read_graphs(path: impl AsRef<Path>) -> Result<Vec<Graph>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let task: TaskFile = bincode::deserialize_from(reader)?;
    for g in &task.pos {
        g.validate()?;
    }
    Ok(task.pos)
}

/// Training and testing data assembled from persisted tasks.
#[derive(Debug, Clone)]
pub struct FewShotData {
    pub train: GraphBatch,
    pub test: GraphBatch,
    pub train_graphs: Vec<Graph>,
    pub test_graphs: Vec<Graph>,
}

/// Directory of persisted tasks for one dataset.
#[derive(Debug, Clone)]
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// `{root}/{dataset}/induced_graphs`
    pub fn new(root: impl AsRef<Path>, dataset: &str) -> Self {
        Self::at(root.as_ref().join(dataset).join("induced_graphs"))
    }

    /// Use `dir` directly.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, class: usize, split: TaskSplit) -> PathBuf {
        self.dir.join(split.file_name(class))
    }

    /// Write the four split files of one class.
    pub fn save(&self, tasks: &ClassTasks) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        for split in SPLITS {
            let path = self.path(tasks.class, split);
            write_graphs(&path, tasks.split(split))?;
            debug!(path = %path.display(), graphs = tasks.split(split).len(), "wrote task file");
        }
        Ok(())
    }

    pub fn save_all(&self, tasks: &[ClassTasks]) -> Result<()> {
        tasks.iter().try_for_each(|t| self.save(t))
    }

    pub fn load(&self, class: usize, split: TaskSplit) -> Result<Vec<Graph>> {
        read_graphs(self.path(class, split))
    }

    /// Assemble few-shot training and testing batches.
    ///
    /// Per class, support and query graphs are concatenated and truncated to
    /// `shots`; every graph is relabelled with its class id. Graphs of all
    /// classes are then shuffled into one batch per phase.
    pub fn load_few_shot(
        &self,
        num_classes: usize,
        shots: usize,
        rng: &mut RngState,
    ) -> Result<FewShotData> {
        let (train_graphs, train_stats) = self.load_phase(
            num_classes,
            shots,
            (TaskSplit::TrainSupport, TaskSplit::TrainQuery),
            rng,
        )?;
        let (test_graphs, test_stats) = self.load_phase(
            num_classes,
            shots,
            (TaskSplit::TestSupport, TaskSplit::TestQuery),
            rng,
        )?;

        info!(?train_stats, "training set (class_id, graph_num)");
        info!(?test_stats, "testing set (class_id, graph_num)");

        Ok(FewShotData {
            train: GraphBatch::from_graphs(&train_graphs)?,
            test: GraphBatch::from_graphs(&test_graphs)?,
            train_graphs,
            test_graphs,
        })
    }

    fn load_phase(
        &self,
        num_classes: usize,
        shots: usize,
        (support, query): (TaskSplit, TaskSplit),
        rng: &mut RngState,
    ) -> Result<(Vec<Graph>, Vec<(usize, usize)>)> {
        let mut graphs = Vec::new();
        let mut stats = Vec::with_capacity(num_classes);

        for class in 0..num_classes {
            let mut list = self.load(class, support)?;
            list.extend(self.load(class, query)?);
            list.truncate(shots);
            stats.push((class, list.len()));
            graphs.extend(list.into_iter().map(|mut g| {
                g.y = Some(Label::Class(class));
                g
            }));
        }

        graphs.shuffle(rng.general());
        Ok((graphs, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeList;
    use ndarray::array;

    fn tiny(v: f32, y: Option<Label>) -> Graph {
        Graph::new(array![[v], [v + 1.0]], EdgeList::from(vec![(0, 1)]), y).unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(TaskSplit::TrainSupport.file_name(3), "task3.meta.train.support");
        assert_eq!(TaskSplit::TestQuery.file_name(0), "task0.meta.test.query");
    }

    #[test]
    fn test_write_read_graphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task0.meta.train.support");
        let graphs = vec![tiny(1.0, Some(Label::Class(0))), tiny(5.0, None)];

        write_graphs(&path, &graphs).unwrap();
        assert_eq!(read_graphs(&path).unwrap(), graphs);
    }

    #[test]
    fn test_out_of_range_edge_rejected_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task0.meta.train.support");
        let corrupt = Graph {
            x: array![[1.0], [2.0]],
            edge_index: EdgeList::from(vec![(0, 1), (0, 7)]),
            y: None,
        };

        write_graphs(&path, &[tiny(1.0, None), corrupt]).unwrap();
        assert!(matches!(
            read_graphs(&path),
            Err(crate::Error::InvalidEdge {
                src: 0,
                dst: 7,
                num_nodes: 2
            })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::at(dir.path());
        assert!(matches!(
            store.load(0, TaskSplit::TrainSupport),
            Err(crate::Error::Io(_))
        ));
    }

    #[test]
    fn test_load_few_shot_relabels_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path(), "Toy");
        assert!(store.dir().ends_with("Toy/induced_graphs"));

        for class in 0..2 {
            // raw labels deliberately wrong
            let make = |k: usize| -> Vec<Graph> {
                (0..k).map(|i| tiny(i as f32, Some(Label::Class(99)))).collect()
            };
            let tasks = ClassTasks {
                class,
                splits: [make(3), make(4), make(2), make(1)],
            };
            store.save(&tasks).unwrap();
        }

        let mut rng = RngState::seed_everything(0);
        let data = store.load_few_shot(2, 5, &mut rng).unwrap();

        // train: min(3 + 4, 5) per class; test: 2 + 1 per class
        assert_eq!(data.train_graphs.len(), 10);
        assert_eq!(data.test_graphs.len(), 6);
        assert_eq!(data.train.num_graphs(), 10);
        assert_eq!(data.test.num_nodes(), 12);

        for class in 0..2 {
            let count = data
                .train_graphs
                .iter()
                .filter(|g| g.y == Some(Label::Class(class)))
                .count();
            assert_eq!(count, 5);
        }
        assert!(data.test_graphs.iter().all(|g| g.y != Some(Label::Class(99))));
    }
}

use crate::{
    domain::{
        Board, BoardId, BoardSnapshot, Column, ColumnId, ColumnUpdate, Ticket, TicketId,
        TicketUpdate,
    },
    error::{KanboardError, Result},
    storage::{BoardTables, NewColumn, NewTicket, Storage},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

/// File-based storage implementation.
///
/// All board data lives in a single JSON document. Each call loads it,
/// applies one change and writes it back while holding `io_lock`, so calls
/// from this process never interleave.
pub struct FileStorage {
    root_path: PathBuf,
    io_lock: Mutex<()>,
}

impl FileStorage {
    const KANBOARD_DIR: &'static str = ".kanboard";
    const DATA_FILE: &'static str = "board_data.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANBOARD_DIR),
            io_lock: Mutex::new(()),
        }
    }

    fn data_file(&self) -> PathBuf {
        self.root_path.join(Self::DATA_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<BoardTables> {
        let data_file = self.data_file();

        if !data_file.exists() {
            return Err(KanboardError::StorageError(format!(
                "{} not initialized",
                data_file.display()
            )));
        }

        let contents = fs::read_to_string(&data_file).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save(&self, tables: &BoardTables) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(tables)?;
        fs::write(self.data_file(), json).await?;
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&BoardTables) -> Result<T> + Send) -> Result<T> {
        let _guard = self.io_lock.lock().await;
        let tables = self.load().await?;
        f(&tables)
    }

    /// Loads, applies `f` and saves. Nothing is written when `f` fails.
    async fn mutate<T>(&self, f: impl FnOnce(&mut BoardTables) -> Result<T> + Send) -> Result<T> {
        let _guard = self.io_lock.lock().await;
        let mut tables = self.load().await?;
        let value = f(&mut tables)?;
        self.save(&tables).await?;
        Ok(value)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        // Seed the demo board on first run
        if !self.data_file().exists() {
            self.save(&BoardTables::seeded()).await?;
        }

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.data_file().exists()
    }

    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.read(|tables| Ok(tables.list_boards())).await
    }

    async fn get_board_data(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        self.read(|tables| tables.snapshot(board_id)).await
    }

    async fn create_board(&self, name: &str) -> Result<Board> {
        self.mutate(|tables| Ok(tables.create_board(name))).await
    }

    async fn update_board(&self, id: &BoardId, name: &str) -> Result<Board> {
        self.mutate(|tables| tables.update_board(id, name)).await
    }

    async fn delete_board(&self, id: &BoardId) -> Result<bool> {
        self.mutate(|tables| Ok(tables.delete_board(id))).await
    }

    async fn create_column(&self, input: &NewColumn) -> Result<Column> {
        self.mutate(|tables| tables.create_column(input)).await
    }

    async fn update_column(&self, input: &ColumnUpdate) -> Result<Column> {
        self.mutate(|tables| tables.update_column(input)).await
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<bool> {
        self.mutate(|tables| Ok(tables.delete_column(id))).await
    }

    async fn create_ticket(&self, input: &NewTicket) -> Result<Ticket> {
        self.mutate(|tables| tables.create_ticket(input)).await
    }

    async fn update_ticket(&self, input: &TicketUpdate) -> Result<Ticket> {
        self.mutate(|tables| tables.update_ticket(input)).await
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<bool> {
        self.mutate(|tables| Ok(tables.delete_ticket(id))).await
    }
}

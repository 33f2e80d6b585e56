use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::db::StoreClient;
use crate::error::InventoryError;
use crate::inventory::Inventory;

const MENU: &str = "Enter choice:
1. Add items in shop
2. Buy item
3. Remove item
4. View Items available
5. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddItems,
    BuyItem,
    RemoveItem,
    ViewItems,
    Exit,
}

impl From<i64> for MenuChoice {
    /// Anything outside 1..=4 leaves the menu.
    fn from(n: i64) -> Self {
        match n {
            1 => MenuChoice::AddItems,
            2 => MenuChoice::BuyItem,
            3 => MenuChoice::RemoveItem,
            4 => MenuChoice::ViewItems,
            _ => MenuChoice::Exit,
        }
    }
}

/// Line-oriented shop menu over any async reader/writer pair.
pub struct Menu<'a, C, R, W> {
    inventory: &'a Inventory<C>,
    input: R,
    output: W,
}

impl<'a, C, R, W> Menu<'a, C, R, W>
where
    C: StoreClient,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(inventory: &'a Inventory<C>, input: R, output: W) -> Self {
        Self {
            inventory,
            input,
            output,
        }
    }

    /// Loop until the user exits or input ends. Operation errors are printed and the loop goes
    /// on; fatal ones are returned.
    pub async fn run(mut self) -> Result<(), InventoryError> {
        loop {
            self.say(MENU).await?;
            let Some(choice) = self.read_number().await? else {
                break;
            };
            let choice = MenuChoice::from(choice);

            self.say("Current table is:").await?;
            let shown = self.show_items().await;
            self.report(shown).await?;

            let outcome = match choice {
                MenuChoice::AddItems => self.add_items().await,
                MenuChoice::BuyItem => self.buy_item().await,
                MenuChoice::RemoveItem => self.remove_item().await,
                MenuChoice::ViewItems => Ok(()),
                MenuChoice::Exit => break,
            };
            self.report(outcome).await?;
        }

        let shown = self.show_items().await;
        self.report(shown).await
    }

    async fn add_items(&mut self) -> Result<(), InventoryError> {
        self.say("Enter item id:").await?;
        let Some(id) = self.read_number().await? else {
            return Ok(());
        };
        self.say("Enter quantity:").await?;
        let Some(quantity) = self.read_number().await? else {
            return Ok(());
        };
        self.say("Enter name:").await?;
        let Some(name) = self.read_line().await? else {
            return Ok(());
        };

        self.inventory.insert(id, quantity, &name).await
    }

    async fn buy_item(&mut self) -> Result<(), InventoryError> {
        self.say("Id of item to buy:").await?;
        let Some(id) = self.read_number().await? else {
            return Ok(());
        };
        self.say("Enter quantity:").await?;
        let Some(quantity) = self.read_number().await? else {
            return Ok(());
        };

        self.inventory.purchase(id, quantity).await.map(|_| ())
    }

    async fn remove_item(&mut self) -> Result<(), InventoryError> {
        self.say("Enter product id to delete").await?;
        let Some(id) = self.read_number().await? else {
            return Ok(());
        };

        self.inventory.delete(id).await.map(|_| ())
    }

    async fn show_items(&mut self) -> Result<(), InventoryError> {
        let rows = self.inventory.list().await?;
        let stamp = Local::now().format("%a %b %e %H:%M:%S %Y");
        self.say(&format!("Items available at {stamp}:")).await?;
        for row in rows {
            self.say(&row.to_string()).await?;
        }
        Ok(())
    }

    async fn report(&mut self, outcome: Result<(), InventoryError>) -> Result<(), InventoryError> {
        match outcome {
            Ok(()) => Ok(()),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!(error = %err, "Operation failed");
                self.say(&format!("Error: {err}")).await
            }
        }
    }

    async fn say(&mut self, text: &str) -> Result<(), InventoryError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// `None` at end of input.
    async fn read_line(&mut self) -> Result<Option<String>, InventoryError> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Re-prompts until the line parses as an integer; `None` at end of input.
    async fn read_number(&mut self) -> Result<Option<i64>, InventoryError> {
        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            match line.trim().parse::<i64>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => self.say("Please enter a whole number:").await?,
            }
        }
    }
}

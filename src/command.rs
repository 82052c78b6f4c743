use std::path::Path;

use crate::config::ImportOptions;
use crate::host::Host;
use crate::import::{ImportFailure, ImportReport, MapImport};

/// Меню хоста, в которое встраивается команда
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    FileImport,
}

/// Пользовательская команда: обработчик, принимающий путь к файлу и параметры
pub trait Command {
    fn id(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn menu(&self) -> Menu;
    /// Расширение файлов для диалога выбора
    fn file_extension(&self) -> &'static str;
    fn execute(
        &self,
        host: &mut dyn Host,
        path: &Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, ImportFailure>;
}

/// «Import Map»: импорт полного JSON-экспорта карты
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportMapCommand;

impl Command for ImportMapCommand {
    fn id(&self) -> &'static str {
        "import.map"
    }

    fn label(&self) -> &'static str {
        "Import Map"
    }

    fn menu(&self) -> Menu {
        Menu::FileImport
    }

    fn file_extension(&self) -> &'static str {
        ".json"
    }

    fn execute(
        &self,
        host: &mut dyn Host,
        path: &Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, ImportFailure> {
        MapImport::new(options).run(host, path)
    }
}

/// Реестр команд хоста
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует команду. Возвращает `false`, если команда с таким id уже есть.
    pub fn register(&mut self, command: Box<dyn Command>) -> bool {
        if self.find(command.id()).is_some() {
            tracing::warn!("Команда {} уже зарегистрирована", command.id());
            return false;
        }
        tracing::debug!("Команда {} → {:?}", command.id(), command.menu());
        self.commands.push(command);
        true
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&dyn Command> {
        self.commands.iter().find(|c| c.id() == id).map(|c| &**c)
    }

    /// Пункты меню в порядке регистрации: `(id, подпись)`
    #[must_use]
    pub fn menu_entries(&self, menu: Menu) -> Vec<(&'static str, &'static str)> {
        self.commands
            .iter()
            .filter(|c| c.menu() == menu)
            .map(|c| (c.id(), c.label()))
            .collect()
    }

    /// Вызывает команду по id; `None`, если такой команды нет
    pub fn invoke(
        &self,
        id: &str,
        host: &mut dyn Host,
        path: &Path,
        options: &ImportOptions,
    ) -> Option<Result<ImportReport, ImportFailure>> {
        self.find(id).map(|command| command.execute(host, path, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::SceneGraph;
    use crate::test_fixtures::sample_json;

    #[test]
    fn import_command_is_listed_in_file_import_menu() {
        let mut registry = CommandRegistry::new();
        assert!(registry.register(Box::new(ImportMapCommand)));
        assert!(!registry.register(Box::new(ImportMapCommand)));
        assert_eq!(registry.menu_entries(Menu::FileImport), vec![("import.map", "Import Map")]);
    }

    #[test]
    fn invoke_runs_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, sample_json().to_string()).unwrap();

        let mut registry = CommandRegistry::new();
        registry.register(Box::new(ImportMapCommand));
        let mut scene = SceneGraph::new();

        let report = registry
            .invoke("import.map", &mut scene, &path, &ImportOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.terrain, "Terrain");
        assert!(scene.object_by_name("Terrain").is_some());

        assert!(registry
            .invoke("export.map", &mut scene, &path, &ImportOptions::default())
            .is_none());
    }
}

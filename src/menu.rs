/*
 *  menu.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Tray menu model
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! Toolkit-independent tray menu model
//!
//! The tray menu is a tree of [`MenuEntry`] values. Plugin sections come
//! first, in configuration order, followed by the fixed host entries.

use std::fmt;

/// What activating a menu item does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    ManagePlugins,
    About,
    Settings,
    Quit,
    /// Dispatch a named behaviour of a menu plugin
    Plugin {
        plugin: String,
        function: String,
        parameter: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub icon: String,
    pub command: MenuCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item(MenuItem),
    Submenu {
        label: String,
        icon: String,
        entries: Vec<MenuEntry>,
    },
    Separator,
}

/// Entries contributed by one plugin
///
/// Every action added here is bound to the owning plugin, so a plugin
/// cannot trigger another plugin's behaviour from its menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    plugin: String,
    title: String,
    icon: String,
    entries: Vec<MenuEntry>,
}

impl MenuSection {
    pub fn new(plugin: &str, title: &str) -> Self {
        Self {
            plugin: plugin.to_string(),
            title: title.to_string(),
            icon: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an item invoking `function` of this plugin with `parameter`
    pub fn action(&mut self, label: &str, icon: &str, function: &str, parameter: &str) -> &mut Self {
        self.entries.push(MenuEntry::Item(MenuItem {
            label: label.to_string(),
            icon: icon.to_string(),
            command: MenuCommand::Plugin {
                plugin: self.plugin.clone(),
                function: function.to_string(),
                parameter: parameter.to_string(),
            },
        }));
        self
    }

    /// Add a nested submenu built by `build`
    pub fn submenu(&mut self, label: &str, icon: &str, build: impl FnOnce(&mut MenuSection)) -> &mut Self {
        let mut inner = MenuSection::new(&self.plugin, label).with_icon(icon);
        build(&mut inner);
        self.entries.push(MenuEntry::Submenu {
            label: inner.title,
            icon: inner.icon,
            entries: inner.entries,
        });
        self
    }

    pub fn separator(&mut self) -> &mut Self {
        self.entries.push(MenuEntry::Separator);
        self
    }

    fn into_entry(self) -> MenuEntry {
        MenuEntry::Submenu {
            label: self.title,
            icon: self.icon,
            entries: self.entries,
        }
    }
}

/// The complete tray menu
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrayMenu {
    entries: Vec<MenuEntry>,
}

impl TrayMenu {
    /// Plugin sections, a separator, then the fixed host entries
    ///
    /// Empty sections are dropped.
    pub fn build(sections: Vec<MenuSection>) -> Self {
        let mut entries: Vec<MenuEntry> = sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(MenuSection::into_entry)
            .collect();

        if !entries.is_empty() {
            entries.push(MenuEntry::Separator);
        }

        for (label, icon, command) in [
            ("Plugin management", "HOME_FILL", MenuCommand::ManagePlugins),
            ("About", "INFO", MenuCommand::About),
            ("Settings", "SETTING", MenuCommand::Settings),
            ("Quit", "EMBED", MenuCommand::Quit),
        ] {
            entries.push(MenuEntry::Item(MenuItem {
                label: label.to_string(),
                icon: icon.to_string(),
                command,
            }));
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Items in depth-first order, the numbering used by `activate`
    pub fn items(&self) -> Vec<&MenuItem> {
        fn walk<'a>(entries: &'a [MenuEntry], out: &mut Vec<&'a MenuItem>) {
            for entry in entries {
                match entry {
                    MenuEntry::Item(item) => out.push(item),
                    MenuEntry::Submenu { entries, .. } => walk(entries, out),
                    MenuEntry::Separator => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.entries, &mut out);
        out
    }

    /// Command of the `index`-th item (1-based)
    pub fn command(&self, index: usize) -> Option<&MenuCommand> {
        index
            .checked_sub(1)
            .and_then(|i| self.items().get(i).copied())
            .map(|item| &item.command)
    }

    /// First item with this label
    pub fn find(&self, label: &str) -> Option<&MenuItem> {
        self.items().into_iter().find(|item| item.label == label)
    }
}

impl fmt::Display for TrayMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn render(
            f: &mut fmt::Formatter<'_>,
            entries: &[MenuEntry],
            depth: usize,
            counter: &mut usize,
        ) -> fmt::Result {
            let indent = "  ".repeat(depth);
            for entry in entries {
                match entry {
                    MenuEntry::Item(item) => {
                        *counter += 1;
                        writeln!(f, "{}{:>3}. {}", indent, counter, item.label)?;
                    }
                    MenuEntry::Submenu { label, entries, .. } => {
                        writeln!(f, "{}     {} >", indent, label)?;
                        render(f, entries, depth + 1, counter)?;
                    }
                    MenuEntry::Separator => writeln!(f, "{}     ----", indent)?,
                }
            }
            Ok(())
        }

        let mut counter = 0;
        render(f, &self.entries, 0, &mut counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_actions_bound_to_plugin() {
        let mut section = MenuSection::new("QuickStart", "Quick start");
        section
            .action("Notepad", "", "execute_command", "notepad.exe")
            .separator()
            .submenu("More", "", |more| {
                more.action("Calc", "", "execute_command", "calc.exe");
            });

        assert_eq!(section.entries().len(), 3);
        match &section.entries()[2] {
            MenuEntry::Submenu { entries, .. } => match &entries[0] {
                MenuEntry::Item(item) => assert_eq!(
                    item.command,
                    MenuCommand::Plugin {
                        plugin: "QuickStart".into(),
                        function: "execute_command".into(),
                        parameter: "calc.exe".into(),
                    }
                ),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tray_layout() {
        let mut a = MenuSection::new("A", "Alpha");
        a.action("Go", "", "go", "");
        let empty = MenuSection::new("B", "Beta");

        let tray = TrayMenu::build(vec![a, empty]);
        let entries = tray.entries();
        assert!(matches!(&entries[0], MenuEntry::Submenu { label, .. } if label == "Alpha"));
        assert_eq!(entries[1], MenuEntry::Separator);
        assert_eq!(entries.len(), 6);

        assert_eq!(tray.items().len(), 5);
        assert!(matches!(tray.command(1), Some(MenuCommand::Plugin { .. })));
        assert_eq!(tray.command(5), Some(&MenuCommand::Quit));
        assert_eq!(tray.command(0), None);
        assert_eq!(tray.command(6), None);
        assert_eq!(tray.find("About").map(|i| &i.command), Some(&MenuCommand::About));
    }

    #[test]
    fn test_tray_without_plugins() {
        let tray = TrayMenu::build(Vec::new());
        assert_eq!(tray.entries().len(), 4);
        assert!(tray.to_string().contains("1. Plugin management"));
    }
}

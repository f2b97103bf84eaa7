//! Builders for the commands the flow sends to the presentation layer.

use donation_registry::FileInput;
use donation_types::{
    Command, ConfirmPrompt, ConsentFormPrompt, ConsentTable, DataTable, DonationPage, ExtractedTable, FileInputPrompt, Page, Prompt,
    Translatable,
};
use serde_json::json;

pub const SUCCESS_EXIT_CODE: i32 = 0;
pub const SUCCESS_EXIT_INFO: &str = "Success";

const NO_DATA: &str = "No data found";

fn page_header(platform: &str) -> Translatable {
    Translatable::new().with("en", platform).with("nl", format!("Je {platform} geschiedenis"))
}

/// Wraps `prompt` in a donation page for `platform`.
pub fn render_page(platform: &str, prompt: Prompt) -> Command {
    Command::Render {
        page: Page::Donation(DonationPage {
            platform: platform.to_string(),
            header: page_header(platform),
            body: prompt,
        }),
    }
}

pub fn file_prompt(input: FileInput) -> Prompt {
    Prompt::FileInput(FileInputPrompt {
        description: input.description,
        extensions: input.accepted_types,
    })
}

/// Asks whether to retry after a file failed validation.
pub fn retry_confirmation(platform: &str) -> Prompt {
    Prompt::Confirm(ConfirmPrompt {
        text: Translatable::new()
            .with(
                "en",
                format!(
                    "Unfortunately, we cannot process your {platform} file. \
                     Continue, if you are sure that you selected the right file. \
                     Try again to select a different file."
                ),
            )
            .with(
                "nl",
                format!(
                    "Helaas, kunnen we uw {platform} bestand niet verwerken. \
                     Weet u zeker dat u het juiste bestand heeft gekozen? \
                     Ga dan verder. Probeer opnieuw als u een ander bestand wilt kiezen."
                ),
            ),
        ok: Translatable::new().with("en", "Try again").with("nl", "Probeer opnieuw"),
        cancel: Translatable::new().with("en", "Continue").with("nl", "Verder"),
    })
}

/// Consent form over `tables`, or over a single "no data found" table when
/// extraction came back empty.
pub fn consent_prompt(platform: &str, tables: Vec<ExtractedTable>) -> Prompt {
    let tables = if tables.is_empty() {
        vec![no_data_table(platform)]
    } else {
        tables.into_iter().map(consent_table).collect()
    };

    Prompt::ConsentForm(ConsentFormPrompt {
        tables,
        meta_tables: Vec::new(),
    })
}

fn consent_table(table: ExtractedTable) -> ConsentTable {
    ConsentTable {
        id: table.name,
        title: table.title,
        data_frame: table.data,
        description: (!table.description.is_blank()).then_some(table.description),
        visualizations: table.visualizations,
    }
}

fn no_data_table(platform: &str) -> ConsentTable {
    let mut data = DataTable::new([NO_DATA]);
    data.push_row(vec![json!(NO_DATA)]);

    ConsentTable {
        id: format!("{}_no_data_found", platform.to_lowercase()),
        title: Translatable::new()
            .with("en", "Nothing went wrong, but we couldn't find any data in your files")
            .with("nl", "Er ging niks mis, maar we konden geen gegevens in jouw data vinden"),
        data_frame: data,
        description: None,
        visualizations: Vec::new(),
    }
}

pub fn donate(key: impl Into<String>, json_string: impl Into<String>) -> Command {
    Command::Donate {
        key: key.into(),
        json_string: json_string.into(),
    }
}

pub fn exit_success() -> Command {
    Command::Exit {
        code: SUCCESS_EXIT_CODE,
        info: SUCCESS_EXIT_INFO.to_string(),
    }
}

pub fn end_page() -> Command {
    Command::Render { page: Page::End }
}

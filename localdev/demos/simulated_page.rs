// SPDX-License-Identifier: MIT OR Apache-2.0
//! Walks a simulated Azure DevOps page through the redirector's lifecycle and prints
//! what happens to its extension iframes.
//!
//! Run with `cargo run -p localdev --example simulated_page`.
use localdev::command::{Command, Response};
use localdev::config::Config;
use localdev::sim::{FrameId, Harness};
use std::time::Duration;

struct Frames {
    page: Harness,
}

impl Command for Frames {
    fn name(&self) -> &'static str {
        "frames"
    }

    fn short_description(&self) -> &'static str {
        "Lists every iframe on the simulated page with its current source."
    }

    fn full_description(&self) -> &'static str {
        self.short_description()
    }

    fn execute(&self, _args: Vec<String>) -> Result<Response, Response> {
        let mut out = String::new();
        for frame in self.page.dom.frames() {
            out.push_str(&describe(&self.page, frame));
            out.push('\n');
        }
        Ok(out.into())
    }
}

fn describe(page: &Harness, frame: FrameId) -> String {
    format!(
        "{:?}: {} [{}]",
        frame,
        page.dom.src_of(frame).unwrap_or_default(),
        page.dom.title_of(frame)
    )
}

fn main() {
    let page = Harness::loading("https://dev.azure.com/contoso/web/_git/portal/pullrequest/42");
    let early = page
        .dom
        .insert_frame(&[("src", "https://portal-ext.azurestaticapps.net/index.html?theme=dark")]);

    let config = Config::example();
    let helper = localdev::begin(page.dom.clone(), page.timers.clone(), config);
    helper.add_command(Frames { page: page.clone() });
    helper
        .run_command(
            "add_mapping",
            vec![
                "https://portal-ext.azurestaticapps.net/".into(),
                "http://localhost:3000/".into(),
            ],
        )
        .unwrap();

    println!("while loading: {}", describe(&page, early));
    page.dom.finish_loading();
    println!("after DOMContentLoaded: {}", describe(&page, early));

    // the application renders a widget later, through the intercepted setter
    let widget = page.dom.insert_frame(&[("class", "external-content--iframe")]);
    page.dom
        .page_set_src(widget, "https://portal-ext.azurestaticapps.net/widget.html");
    page.advance(Duration::from_millis(200));

    // a bulk markup rewrite nothing observes; the poller picks it up
    page.dom.replace_src_silently(
        early,
        "https://portal-ext.azurestaticapps.net/index.html?theme=light",
    );
    page.advance(Duration::from_secs(3));

    print!("{}", helper.run_command("frames", vec![]).unwrap());
    println!("{}", helper.run_command("config", vec![]).unwrap());
}

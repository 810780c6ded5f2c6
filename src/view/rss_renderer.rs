use std::io::Cursor;

use chrono::{TimeZone, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::datalog::DataLog;

/// RSS 2.0 channel of the DataLogs. Items link to `<site_url>/datalogs/<slug>/`.
pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub ch_link: &'a str,
    pub ch_desc: &'a str,
}

impl<'a> RssChannel<'a> {
    pub fn render(&self, logs: &[&DataLog]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        rss.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;

        for log in logs {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", &log.title)?;
            push_text(&mut writer, "link", &full_link(self.ch_link, &log.url()))?;

            let mut guid_elem = BytesStart::new("guid");
            guid_elem.push_attribute(("isPermaLink", "false"));
            writer.write_event(Event::Start(guid_elem))?;
            writer.write_event(Event::Text(BytesText::new(&log.id)))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            if !log.author.is_empty() {
                push_text(&mut writer, "dc:creator", &log.author)?;
            }
            for tag in log.tags.iter() {
                push_text(&mut writer, "category", tag)?;
            }

            push_cdata(&mut writer, "description", &log.summary_html)?;

            let dt = Utc.from_utc_datetime(&log.date);
            push_text(&mut writer, "pubDate", &dt.to_rfc2822())?;

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

fn full_link(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    // `]]>` cannot appear inside a section, so it is split across two adjacent ones
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        let head = if i == 0 { "" } else { ">" };
        let tail = if i == last { "" } else { "]]" };
        let section = format!("{}{}{}", head, part, tail);
        writer.write_event(Event::CData(BytesCData::new(section.as_str())))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

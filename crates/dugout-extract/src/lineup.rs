//! Player links on a game's lineup page.
//!
//! The lineup page links every player of both teams to a detail page, so it
//! names ids that a legacy box score prints as plain text.

use dugout_core::{
  box_score::PlayerId,
  roster::{LineupRoster, RosterCandidate},
};
use scraper::{ElementRef, Html};

use crate::{
  Result,
  table::{element_text, player_id_from_href, selector},
};

/// Every linked player on `html`, keyed by link text.
pub fn lineup_roster(html: &str) -> Result<LineupRoster> {
  let doc = Html::parse_document(html);
  let links = selector("a[href*='PlayerDetail']")?;

  let mut roster = LineupRoster::default();
  for a in doc.select(&links) {
    let Some(player_id) = a.value().attr("href").and_then(linked_id) else {
      continue;
    };
    let name = element_text(a);
    roster.insert(&name, RosterCandidate {
      player_id,
      uniform_no: list_item_uniform(a),
    });
  }
  Ok(roster)
}

/// `playerId=` or the older `p_id=` parameter.
fn linked_id(href: &str) -> Option<PlayerId> {
  player_id_from_href(href).or_else(|| {
    let (_, rest) = href.split_once("p_id=")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
  })
}

/// The `No.NN` printed in the link's enclosing list item.
fn list_item_uniform(a: ElementRef<'_>) -> Option<String> {
  let li = a
    .ancestors()
    .filter_map(ElementRef::wrap)
    .find(|el| el.value().name() == "li")?;
  let text = element_text(li);
  let (_, rest) = text.split_once("No.")?;
  let digits: String = rest
    .trim_start()
    .chars()
    .take_while(char::is_ascii_digit)
    .collect();
  (!digits.is_empty()).then_some(digits)
}

#[cfg(test)]
mod tests {
  use super::*;

  const LINEUP: &str = r#"
    <html><body>
      <ul class="away">
        <li><span>No.1</span> <a href="/Record/Player/PlayerDetail/Basic.aspx?playerId=62415">양의지</a></li>
        <li>No. 52 <a href="/Record/Player/PlayerDetail/Basic.aspx?p_id=79192">김재환</a></li>
      </ul>
      <table><tr><td><a href="/Record/Player/PlayerDetail/Basic.aspx?playerId=50054">김현수</a></td></tr></table>
      <ul class="home">
        <li>No.22 <a href="/Record/Player/PlayerDetail/Basic.aspx?playerId=60054">김현수</a></li>
        <li><a href="/Record/Player/PlayerDetail/Basic.aspx?playerId=60054">김현수</a></li>
        <li><a href="/Record/Player/PlayerDetail/Basic.aspx">이름없음</a></li>
        <li><a href="/Record/Team/Main.aspx?teamId=5">LG</a></li>
      </ul>
    </body></html>"#;

  #[test]
  fn links_are_collected_by_name() {
    let roster = lineup_roster(LINEUP).unwrap();
    assert_eq!(roster.len(), 3);
    assert_eq!(roster.candidates("양의지"), &[RosterCandidate {
      player_id:  PlayerId(62415),
      uniform_no: Some("1".to_string()),
    }]);
    assert_eq!(roster.candidates("김재환")[0].player_id, PlayerId(79192));
    assert_eq!(roster.candidates("김재환")[0].uniform_no.as_deref(), Some("52"));
  }

  #[test]
  fn same_name_on_both_teams_keeps_both_ids() {
    let roster = lineup_roster(LINEUP).unwrap();
    let ids: Vec<_> = roster.candidates("김현수").iter().map(|c| c.player_id).collect();
    assert_eq!(ids, vec![PlayerId(50054), PlayerId(60054)]);
    assert_eq!(roster.candidates("김현수")[0].uniform_no, None);
  }

  #[test]
  fn pages_without_player_links_are_empty() {
    assert!(lineup_roster("<html><body>우천 취소</body></html>").unwrap().is_empty());
  }
}
